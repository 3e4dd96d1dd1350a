#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlCreateTable,
    SqlDropTable,
    SqlDeleteFrom,
    SqlDeleteFromWhere,
    SqlInsertInto,
    SqlInsertIntoValues,
    SqlUpdate,
    SqlUpdateSet,
    SqlUpdateWhere,
    SqlSelect,
    SqlSelectFrom,
    SqlSelectWhere,
    SqlSelectGroupBy,
    SqlSelectOrderBy,
    SqlJoin,
    SqlJoinOn,
}

/// Where the writer currently is, and how columns must be qualified.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub fragment: Fragment,
    /// Table alias prefixed to column names, empty for none.
    pub qualifier: &'static str,
}

impl Context {
    pub fn new(fragment: Fragment) -> Self {
        Self {
            fragment,
            qualifier: "",
        }
    }

    pub fn switch_fragment(&self, fragment: Fragment) -> Context {
        Context { fragment, ..*self }
    }

    pub fn qualified(&self, qualifier: &'static str) -> Context {
        Context { qualifier, ..*self }
    }
}
