//! Database seeding run once at startup

pub mod seed_data;
pub mod seeder;

pub use seeder::{run_seeder, DatabaseSeeder, SeedError, SeedReport};
