pub mod events;
pub mod farm;
pub mod filter;
pub mod queue;
pub mod scale;
pub mod sim;

#[cfg(test)]
mod test;
