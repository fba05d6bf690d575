use std::path::Path;

use ndarray::{s, Array4};

use crate::field::MultiField;
use crate::pml::{PatchType, Pml, PmlPatch};
use crate::{Error, Real};

fn group_name(which: PatchType) -> &'static str {
    match which {
        PatchType::Fine => "fp",
        PatchType::Coarse => "cp",
    }
}

fn has_member(group: &hdf5::Group, name: &str) -> Result<bool, Error> {
    Ok(group.member_names()?.iter().any(|m| m == name))
}

impl Pml {
    /// Saves every split-field array of the layer to `filename`.
    ///
    /// Each array becomes a group of one dataset per box, named by box index,
    /// holding its guard-inclusive data. The damping profiles are not saved.
    pub fn checkpoint<P: AsRef<Path>>(&self, filename: P) -> Result<(), Error> {
        if !self.ok {
            return Err(Error::InvalidPml);
        }
        let file = hdf5::File::create(filename)?;

        file.new_attr::<u64>()
            .shape(hdf5::Extents::Scalar)
            .create("level")?
            .write_scalar(&(self.level as u64))?;
        file.new_attr::<Real>()
            .shape(hdf5::Extents::Scalar)
            .create("time_step")?
            .write_scalar(&self.dt)?;

        for which in [PatchType::Fine, PatchType::Coarse] {
            if let Some(patch) = self.patch(which) {
                let group = file.create_group(group_name(which))?;
                write_patch(&group, patch)?;
            }
        }

        file.close()?;
        Ok(())
    }

    /// Loads split-field arrays saved by [`checkpoint`](Pml::checkpoint) into
    /// a layer constructed with the same parameters.
    ///
    /// Arrays missing from the file are left untouched. Arrays saved with
    /// fewer split components, before divergence cleaning was enabled, fill
    /// the leading components and zero the rest.
    pub fn restart<P: AsRef<Path>>(&mut self, filename: P) -> Result<(), Error> {
        if !self.ok {
            return Err(Error::InvalidPml);
        }
        let file = hdf5::File::open(filename)?;

        for which in [PatchType::Fine, PatchType::Coarse] {
            let Some(patch) = self.patch_mut(which) else {
                continue;
            };
            let name = group_name(which);
            if !has_member(&file, name)? {
                log::warn!("checkpoint has no {} PML patch, leaving it at zero", name);
                continue;
            }
            let group = file.group(name)?;
            for (field, mf) in patch.named_fields_mut() {
                if has_member(&group, field)? {
                    read_field(&group.group(field)?, name, field, mf)?;
                } else {
                    log::warn!("checkpoint has no {}/{} PML array, leaving it at zero", name, field);
                }
            }
        }

        file.close()?;
        Ok(())
    }
}

fn write_patch(group: &hdf5::Group, patch: &PmlPatch) -> Result<(), Error> {
    for (field, mf) in patch.named_fields() {
        let field_group = group.create_group(field)?;
        for (i, fab) in mf.fabs().iter().enumerate() {
            field_group.new_dataset::<Real>()
                .shape(fab.data().shape().to_vec())
                .create(i.to_string().as_str())?
                .write(fab.data())?;
        }
        log::debug!("checkpointed PML array {} ({} boxes)", field, mf.len());
    }
    Ok(())
}

fn read_field(group: &hdf5::Group, patch: &str, field: &str, mf: &mut MultiField) -> Result<(), Error> {
    for (i, fab) in mf.fabs_mut().iter_mut().enumerate() {
        let name = i.to_string();
        if !has_member(group, &name)? {
            log::warn!("checkpoint has no box {} of PML array {}/{}", i, patch, field);
            continue;
        }
        let data: Array4<Real> = group.dataset(&name)?.read()?;
        let stored = data.shape();
        let expected = fab.data().shape();
        if stored[1..] != expected[1..] || stored[0] > expected[0] {
            return Err(Error::BadInit {
                array_name: format!("{}/{}[{}]", patch, field, i),
                input_shape: stored.to_vec(),
                expected_shape: expected.to_vec(),
            });
        }
        if stored[0] < expected[0] {
            // saved before divergence cleaning added a split component
            log::warn!(
                "checkpointed PML array {}/{}[{}] has {} of {} components, leaving the rest at zero",
                patch,
                field,
                i,
                stored[0],
                expected[0]
            );
        }
        let ncomp = stored[0];
        let dst = fab.data_mut();
        dst.slice_mut(s![..ncomp, .., .., ..]).assign(&data);
        dst.slice_mut(s![ncomp.., .., .., ..]).fill(0.0);
    }
    log::debug!("restored PML array {}/{}", patch, field);
    Ok(())
}
