use super::Instance;

/// Instances held for one association accessor.
#[derive(Debug)]
pub enum Related {
    One(Box<Instance>),
    Many(Vec<Instance>),
}

impl Related {
    pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
        match self {
            Related::One(instance) => std::slice::from_ref(&**instance).iter(),
            Related::Many(instances) => instances.iter(),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_one(&self) -> Option<&Instance> {
        match self {
            Related::One(instance) => Some(instance),
            Related::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[Instance]> {
        match self {
            Related::Many(instances) => Some(instances),
            Related::One(_) => None,
        }
    }
}

impl<'a> IntoIterator for &'a Related {
    type Item = &'a Instance;
    type IntoIter = std::slice::Iter<'a, Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
