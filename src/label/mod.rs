//! Label classification into version increment directives.

pub mod classifier;
pub mod directive;

pub use classifier::LabelRules;
pub use directive::IncrementDirective;
