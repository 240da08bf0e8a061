pub mod can_bus;
pub mod smbus;
