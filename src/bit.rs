//! Bit manipulation helpers used by the register field definitions.

#[macro_export]
macro_rules! BIT {
    ( $x:expr ) => {
        1 << $x
    };
}

#[macro_export]
macro_rules! BIT_MASK_LEN {
    ( $x:expr ) => {
        BIT!($x) - 1
    };
}

// bits range: BIT_RNG(4, 5)  0b110000,  start from 4, end at 5 inclusive
#[macro_export]
macro_rules! BIT_RNG {
    ( $s:expr, $e:expr ) => {
        BIT_MASK_LEN!($e - $s + 1) << $s
    };
}
