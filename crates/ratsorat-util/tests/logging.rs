use ratsorat_util::logging;

#[test]
fn test_init_is_idempotent() {
    logging::init();
    assert!(!logging::init(), "second init must not install a subscriber");
}
