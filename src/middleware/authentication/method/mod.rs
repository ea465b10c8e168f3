mod f_basic;

pub use f_basic::try_basic;
