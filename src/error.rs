use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatsError>;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Git error: {0}")]
    Git(#[from] Box<gix::open::Error>),
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
    #[error("Git repository error: {0}")]
    GitRepo(String),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
    #[error("Diff tree to tree error: {0}")]
    DiffTreeToTree(#[from] Box<gix::repository::diff_tree_to_tree::Error>),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StatsError {
    /// Whether the error came from resolving the repository, a reference or
    /// an object. These abort a whole aggregation run.
    pub fn is_repository_access(&self) -> bool {
        matches!(
            self,
            StatsError::Git(_)
                | StatsError::GitDiscover(_)
                | StatsError::GitRepo(_)
                | StatsError::ObjectFind(_)
                | StatsError::ObjectFindConv(_)
                | StatsError::Commit(_)
                | StatsError::ObjectDecode(_)
                | StatsError::RefFind(_)
                | StatsError::HeadPeel(_)
        )
    }
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::open::Error> for StatsError {
    fn from(err: gix::open::Error) -> Self {
        StatsError::Git(Box::new(err))
    }
}

impl From<gix::discover::Error> for StatsError {
    fn from(err: gix::discover::Error) -> Self {
        StatsError::GitDiscover(Box::new(err))
    }
}

impl From<gix::object::find::existing::Error> for StatsError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        StatsError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for StatsError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        StatsError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for StatsError {
    fn from(err: gix::object::commit::Error) -> Self {
        StatsError::Commit(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for StatsError {
    fn from(err: gix::objs::decode::Error) -> Self {
        StatsError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for StatsError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        StatsError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for StatsError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        StatsError::HeadPeel(Box::new(err))
    }
}

impl From<gix::repository::diff_tree_to_tree::Error> for StatsError {
    fn from(err: gix::repository::diff_tree_to_tree::Error) -> Self {
        StatsError::DiffTreeToTree(Box::new(err))
    }
}
