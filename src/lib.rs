//! # so3rep: Representation Theory of SO(3)
//!
//! `so3rep` provides the representation-theoretic machinery of the three-dimensional rotation
//! group needed to build rotation-equivariant tensor operations:
//! - rotation algebra in the $`z`$-$`y`$-$`z`$ Euler convention (construction, inversion,
//!   composition, and uniform sampling of rotations),
//! - real spherical harmonics evaluated through a stable Legendre recurrence,
//! - irreducible representation matrices (real Wigner-$`D`$ matrices) acting on the real
//!   spherical-harmonic basis,
//! - Clebsch--Gordan coupling tensors, cached per degree triple,
//! - reduction of tensor products of reducible representations into direct sums of
//!   irreducibles with an explicit orthogonal change-of-basis tensor, and
//! - fixed change-of-basis matrices between Cartesian and spherical bases.
//!
//! ## Conventions
//!
//! A rotation $`\hat{R}(\alpha, \beta, \gamma)`$ is represented by the matrix
//!
//! ```math
//! \mathbf{R}(\alpha, \beta, \gamma)
//!     = \mathbf{R}_z(\alpha) \mathbf{R}_y(\beta) \mathbf{R}_z(\gamma)
//! ```
//!
//! acting on column vectors of Cartesian coordinates. The real spherical harmonics
//! $`Y_{lm}`$ of degree $`l`$ are ordered by increasing $`m = -l, \ldots, l`$, so that
//! $`(Y_{1,-1}, Y_{1,0}, Y_{1,1}) \propto (y, z, x)`$, and every representation matrix
//! $`\mathbf{D}^{(l)}`$ produced by this crate satisfies
//!
//! ```math
//! \mathbf{Y}_l(\mathbf{R}\mathbf{x}) = \mathbf{D}^{(l)}(\mathbf{R}) \mathbf{Y}_l(\mathbf{x}).
//! ```
//!
//! ## Precision
//!
//! All numeric entry points are generic over [`precision::So3Float`], implemented for `f32`
//! and `f64`. The precision of a call is selected by its type parameter; coefficient tables
//! (Clebsch--Gordan tensors and fixed basis matrices) are always computed and cached in double
//! precision and cast on output.
//!
//! ## Examples and usage
//!
//! For most items (structs, enums, functions, and traits), their usages are illustrated in test
//! functions. For more explanation, please consult this documentation.

pub mod angmom;
pub(crate) mod auxiliary;
pub mod precision;
pub mod representation;
pub mod rotation;
