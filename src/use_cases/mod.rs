pub mod telegram_login;
pub mod vault;
pub mod verify_init_data;

#[cfg(test)]
pub(crate) mod test_support;
