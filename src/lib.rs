pub mod catalog;
pub mod controller;
pub mod domain;
pub mod inputter;
pub mod model;
pub mod parse;
pub mod report;
pub mod stats;
pub mod ui;
pub mod view;
