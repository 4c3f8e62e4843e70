//! Built-in topic collections for corpus bootstrapping.

/// Article titles for a named topic collection, or `None` if unknown.
pub fn topic_articles(topic: &str) -> Option<&'static [&'static str]> {
    match topic {
        "machine_learning" => Some(&[
            "Machine learning",
            "Deep learning",
            "Neural network",
            "Supervised learning",
            "Unsupervised learning",
            "Reinforcement learning",
            "Support vector machine",
            "Random forest",
            "Natural language processing",
            "Computer vision",
            "Convolutional neural network",
            "Transformer (machine learning model)",
            "BERT (language model)",
            "GPT-3",
            "Large language model",
        ]),
        "artificial_intelligence" => Some(&[
            "Artificial intelligence",
            "Machine learning",
            "Expert system",
            "Knowledge representation",
            "Automated reasoning",
            "Robotics",
            "Intelligent agent",
            "Artificial general intelligence",
            "AI alignment",
            "Explainable artificial intelligence",
            "Turing test",
            "Chinese room",
            "Symbolic artificial intelligence",
            "Connectionism",
            "Evolutionary computation",
        ]),
        "data_science" => Some(&[
            "Data science",
            "Big data",
            "Data mining",
            "Statistical inference",
            "Predictive analytics",
            "Data visualization",
            "Business intelligence",
            "Apache Spark",
            "Hadoop",
            "Python (programming language)",
            "R (programming language)",
            "Pandas (software)",
            "NumPy",
            "Scikit-learn",
        ]),
        _ => None,
    }
}

/// The known topic names, for error messages.
pub const TOPIC_NAMES: &[&str] = &["machine_learning", "artificial_intelligence", "data_science"];
