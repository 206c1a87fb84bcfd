pub mod bar;
pub mod option_contract;
pub mod quote;
pub mod request_params;
