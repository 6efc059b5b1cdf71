pub mod looper;
pub mod manual;
