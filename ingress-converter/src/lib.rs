#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod args;

pub use self::args::ConverterArgs;
pub use ingress_converter_core as core;
pub use ingress_converter_k8s_api as k8s;
pub use ingress_converter_k8s_convert as convert;
