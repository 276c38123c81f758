pub mod card_rows;
pub mod projection;
