mod health_tests;
mod market_tests;
mod search_tests;
