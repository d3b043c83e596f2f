mod dashboard;
mod sections;

pub use dashboard::Dashboard;
