pub mod follow;
pub mod membership;
pub mod recipe_view;
pub mod recipe_writer;
pub mod shopping_list;
