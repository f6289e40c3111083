pub mod assignments;
pub mod classes;
pub mod events;
pub mod health;
pub mod leaderboard;
pub mod settings;
pub mod students;
pub mod submissions;
pub mod teachers;
