use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use std::io::Write;
use std::path::Path;

impl Repository {
    pub fn hash_object(&self, object_path: &str, write: bool) -> anyhow::Result<()> {
        let data = self.workspace().read_file(Path::new(object_path))?;
        let object = Blob::new(data);

        let object_id = match write {
            true => self.database().store(&object)?,
            false => object.object_id()?,
        };

        writeln!(self.writer(), "{object_id}")?;

        Ok(())
    }
}
