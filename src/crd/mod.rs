mod certificate;

pub use certificate::*;
