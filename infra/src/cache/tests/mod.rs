mod redis_rotation_store_tests;
