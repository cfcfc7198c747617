//! Integration test suite for sibling relations over the fixture database.
//!
//! Tests are organized by area:
//! 1. Attach/query symmetry and query correctness
//! 2. Storage constraints (unique index, foreign keys, direct inserts)
//! 3. Named scenarios
//! 4. Concurrent attach races

mod concurrency_tests;
mod constraint_tests;
mod helpers;
mod scenario_tests;
mod symmetry_tests;
