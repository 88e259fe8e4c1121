pub mod generator;
pub mod planner;
pub mod supabase;
pub mod trips;
