/*! Test coverage for the core IR.
 *
 * Builders, traversal and type rewriting are used by every pass, so their edge cases are checked
 * here once rather than through each pass.
 */

mod builder_api_tests;
