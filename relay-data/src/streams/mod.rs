pub mod consumer;
pub mod listener;
pub mod validator;
