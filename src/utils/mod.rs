pub mod jwt;
pub mod password;
pub mod slug;
pub mod validation;
