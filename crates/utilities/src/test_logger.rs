/// Initialises a logger that prints to the test output. Can be called from
/// multiple tests, only the first call has an effect.
pub fn test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
