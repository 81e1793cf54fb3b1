//! Argument parsing never panics; a lone bare argument is the protocol file.

use proptest::prelude::*;
use pv_demo::cli::{self, Command};

proptest! {
    #[test]
    fn arbitrary_args_never_panic(args in prop::collection::vec("[-a-z=./]{0,16}", 0..6)) {
        let _ = cli::parse(args);
    }

    #[test]
    fn single_file_is_taken_as_protocol(name in "[a-z]{1,12}\\.json") {
        match cli::parse(vec![name.clone()]) {
            Ok(Command::Run(opts)) => {
                prop_assert_eq!(opts.protocol.as_deref(), Some(std::path::Path::new(&name)));
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }
}
