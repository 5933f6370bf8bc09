pub mod moderation;
pub mod roles;

#[cfg(test)]
pub(crate) mod testing;
