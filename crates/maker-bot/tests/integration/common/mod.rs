pub mod scripted_strategy;
