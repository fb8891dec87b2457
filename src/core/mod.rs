pub mod climate;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod generator;
pub mod quantity;
pub mod rng;
pub mod roller;
pub mod scoring;
pub mod selector;
pub mod spawner;
pub mod synth;
pub mod timeline;
