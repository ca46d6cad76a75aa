use crate::error::TreeError;

/// Shape of a tree: how many features it reads and how many classes each output predicts.
///
/// Fixed once the tree is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeParams {
    num_features: usize,
    num_classes_list: Vec<usize>,
}

impl TreeParams {
    /// Creates the shape of a tree with `num_classes_list.len()` outputs.
    ///
    /// # Errors
    ///
    /// This method will return an error if there are no features, no outputs,
    /// or an output with no classes.
    pub fn new(num_features: usize, num_classes_list: Vec<usize>) -> Result<Self, TreeError> {
        let mut params = Self {
            num_features: 1,
            num_classes_list: vec![1],
        };
        params.set_num_features(num_features)?;
        params.set_num_classes_list(num_classes_list)?;
        Ok(params)
    }

    /// Shape of a single-output classifier.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TreeParams::new`].
    pub fn single_output(num_features: usize, num_classes: usize) -> Result<Self, TreeError> {
        Self::new(num_features, vec![num_classes])
    }

    pub fn set_num_features(&mut self, num_features: usize) -> Result<(), TreeError> {
        if num_features < 1 {
            return Err(TreeError::InvalidFeatureCount { num_features });
        }
        self.num_features = num_features;
        Ok(())
    }

    pub fn set_num_classes_list(&mut self, num_classes_list: Vec<usize>) -> Result<(), TreeError> {
        if num_classes_list.is_empty() {
            return Err(TreeError::NoOutputs);
        }
        if let Some((output, &num_classes)) = num_classes_list
            .iter()
            .enumerate()
            .find(|(_, &num_classes)| num_classes < 1)
        {
            return Err(TreeError::InvalidClassCount {
                output,
                num_classes,
            });
        }
        self.num_classes_list = num_classes_list;
        Ok(())
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_outputs(&self) -> usize {
        self.num_classes_list.len()
    }

    pub fn num_classes_list(&self) -> &[usize] {
        &self.num_classes_list
    }

    /// Largest class count over all outputs; the per-output stride of probability buffers.
    pub fn max_num_classes(&self) -> usize {
        self.num_classes_list.iter().copied().max().unwrap_or(1)
    }
}
