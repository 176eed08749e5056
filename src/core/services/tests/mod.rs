mod budget_guard_tests;
