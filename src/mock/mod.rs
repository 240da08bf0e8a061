pub mod mock_can;
pub mod mock_constants;
pub mod mock_i2c;
pub mod mock_plant;
