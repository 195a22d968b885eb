use crate::{
    runtime::{error::Result, ident::CallId},
    surface::Surface,
};

use super::Runtime;

impl<S: Surface> Runtime<S> {
    /// Pops two values and pushes `1` if they are equal in type and value,
    /// `0` otherwise.
    pub fn compare(&mut self, id: CallId) -> Result<bool> {
        let equal = self.stack.compare()?;
        diag!(self, trace, site = %self.ids.label(id), equal, "compare");
        Ok(equal)
    }
}
