mod all_combinator;
mod all_settled;
mod properties;
