/// Part of the statement being written.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlSelect,
    SqlInsertInto,
    SqlInsertIntoValues,
    SqlUpdate,
    SqlDeleteFromWhere,
    SqlMerge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    /// Next positional placeholder.
    pub counter: u32,
    pub fragment: Fragment,
    /// Null values are written as NULL instead of DEFAULT inside inserted rows.
    pub keep_nulls: bool,
}

impl Context {
    pub fn new(fragment: Fragment) -> Self {
        Self {
            counter: 0,
            fragment,
            keep_nulls: true,
        }
    }

    pub fn with_keep_nulls(mut self, keep_nulls: bool) -> Self {
        self.keep_nulls = keep_nulls;
        self
    }

    pub fn switch_fragment(&mut self, fragment: Fragment) -> &mut Self {
        self.fragment = fragment;
        self
    }

    /// Name of the next positional placeholder, `@p0`, `@p1`, ...
    pub fn next_placeholder(&mut self) -> String {
        let mut buffer = itoa::Buffer::new();
        let name = format!("@p{}", buffer.format(self.counter));
        self.counter += 1;
        name
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(Fragment::None)
    }
}
