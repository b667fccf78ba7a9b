pub(crate) mod checksums;
pub(crate) mod device;
pub(crate) mod inspect;
pub(crate) mod patch;
pub(crate) mod path_helpers;
pub(crate) mod paths;
pub(crate) mod run;

pub(crate) use checksums::command_checksums;
pub(crate) use inspect::command_inspect;
pub(crate) use patch::command_patch;
pub(crate) use paths::command_paths;
pub(crate) use run::command_run;
