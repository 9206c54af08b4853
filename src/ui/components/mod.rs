pub mod chart;
pub mod countdown_prompt;
pub mod passage_menu;
pub mod stats_sidebar;
pub mod typing_area;
