mod profiles;
mod time_blocks;

pub(crate) use profiles::ProfileModel;
pub(crate) use time_blocks::TimeBlockModel;
