/// eng
/// Henderson-Hasselbalch equilibrium between ammonium and free (unionized) ammonia.
/// Gives the fraction of total ammonia that is available for gas-liquid or membrane transfer at a given pH
pub mod ammonia_equilibrium;
/// eng
/// Absorption rate, stripping rate and membrane flux of free ammonia, computed element-wise over the
/// measured concentration series for the current set of mass-transfer parameters
/// (gas-phase coefficient k_G, liquid-phase coefficient k_L, permeability P_A, pH).
/// # Examples
/// ```
/// use NH3Recovery::MassTransfer::mass_transfer_rates::{MassTransferParams, MassTransferResult};
/// use NH3Recovery::MassTransfer::ammonia_equilibrium::nh3_fraction_default;
/// use nalgebra::DVector;
/// use approx::assert_relative_eq;
/// let ammonia = DVector::from_vec(vec![1.0, 2.0, 0.034 / nh3_fraction_default(7.5)]);
/// let params = MassTransferParams::new(0.010, 0.005, 0.010, 7.5);
/// let result = MassTransferResult::from_series(&ammonia, &params).unwrap();
/// let f = nh3_fraction_default(7.5);
/// assert_relative_eq!(result.absorption_rate[0], 0.010 * (1.0 * f - 0.034), epsilon = 1e-15);
/// // the third record sits exactly on the reference concentration
/// assert_relative_eq!(result.absorption_rate[2], 0.0, epsilon = 1e-15);
/// assert_eq!(result.membrane_flux.len(), 3);
/// ```
pub mod mass_transfer_rates;
