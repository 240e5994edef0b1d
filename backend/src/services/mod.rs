pub mod form;
pub mod topics;
