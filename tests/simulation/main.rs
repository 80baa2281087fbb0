macro_rules! setup {
    () => {
        let _ = env_logger::builder().is_test(true).try_init();
    };
}

mod traces;
mod tests;
