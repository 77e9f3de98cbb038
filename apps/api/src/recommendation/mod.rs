// Recommendations: questionnaire answers scored into an interest profile,
// then ranked against the clustered occupation corpus.

pub mod handlers;
pub mod profile;
pub mod ranker;
