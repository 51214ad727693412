mod token_cache_tests;
