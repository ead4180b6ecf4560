pub mod lexicon;
pub mod moderate;
pub mod settings;
pub mod status;
