use hybrid_rag::{KeywordRouter, QueryClassifier, Route};

#[test]
fn test_routes_product_questions() {
    let router = KeywordRouter::default();

    let cases = [
        ("What is the price of X200?", Route::Vector),
        ("Define photovoltaic efficiency", Route::Vector),
        ("How is X200 related to Y300?", Route::Graph),
        ("Show the evolution of the panel range", Route::Graph),
        ("Tell me about solar", Route::Hybrid),
        ("", Route::Hybrid),
    ];

    for (query, expected) in cases {
        assert_eq!(router.classify(query), expected, "query: {:?}", query);
    }
}

#[test]
fn test_vector_cues_take_precedence() {
    let router = KeywordRouter::default();
    assert_eq!(router.classify("What is the history of the X200?"), Route::Vector);
}

#[test]
fn test_routes_french_questions() {
    let router = KeywordRouter::default();
    assert_eq!(router.classify("Quel est le PRIX du panneau ?"), Route::Vector);
    assert_eq!(router.classify("Quel est l'historique de la gamme ?"), Route::Graph);
}
