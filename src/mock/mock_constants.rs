// Top speed of the simulated shaft in radians per second at the full
// output. In the simulation, we just use a single value. In the real
// system, each joint has its own calibrated value.
pub const PLANT_MAX_SPEED: f32 = 6.0;

// Time constant of the first-order velocity response in seconds.
pub const PLANT_TIME_CONSTANT: f32 = 0.05;

// Trigger positions of the travel-end switches in radians. Switch A stops
// the forward travel and switch B stops the backward travel; switches C and
// D are not populated on the simulated shaft.
pub const PLANT_FORWARD_LIMIT_POSITION: f32 = 3.0;
pub const PLANT_BACKWARD_LIMIT_POSITION: f32 = -3.0;
